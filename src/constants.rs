/// Canonical source column headers.
pub mod columns {
    /// Book title column (required).
    pub const TITLE: &str = "Title";
    /// Top-level category column (required).
    pub const CATEGORY: &str = "Category";
    /// Sub-category column; blank cells flatten the hierarchy.
    pub const SUB_CATEGORY: &str = "Sub-Category";
    /// Reading status column (required).
    pub const STATUS: &str = "Status";
    /// Reading start date column.
    pub const START: &str = "Start";
    /// Reading finish date column.
    pub const END: &str = "End";
    /// Numeric evaluation column.
    pub const EVALUATION: &str = "Evaluation";
    /// Author column (tooltip passthrough).
    pub const AUTHOR: &str = "Author";
    /// Book type column (tooltip passthrough).
    pub const TYPE: &str = "Type";
    /// Language column (tooltip passthrough).
    pub const LANGUAGE: &str = "Language";
    /// Binary/image column dropped before any processing.
    pub const COVER: &str = "Cover";
}

/// Constants describing status semantics.
pub mod status {
    /// Status literal marking a finished book; only these feed the evaluation view.
    pub const READ: &str = "Read";
}

/// Default colour palettes.
pub mod palette {
    /// Position-based status palette: green, yellow, blue, red.
    pub const STATUS: [&str; 4] = ["#008000", "#FFFF00", "#0000FF", "#FF0000"];
    /// Qualitative palette used for category colouring.
    pub const CATEGORICAL: [&str; 10] = [
        "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
        "#FF97FF", "#FECB52",
    ];
    /// Low stop of the evaluation scale.
    pub const SCALE_LOW: &str = "#FF0000";
    /// Mid stop of the evaluation scale.
    pub const SCALE_MID: &str = "#FFFFFF";
    /// High stop of the evaluation scale.
    pub const SCALE_HIGH: &str = "#008000";
}

/// Constants used by composition views.
pub mod hierarchy {
    /// Depth limit for the overall composition (category + sub-category level).
    pub const OVERVIEW_DEPTH_LIMIT: usize = 2;
    /// Depth limit for the evaluation composition (full depth).
    pub const EVALUATION_DEPTH_LIMIT: usize = 3;
    /// Separator used when building node ids from label paths.
    pub const PATH_SEPARATOR: &str = "/";
    /// Separator between a leaf path and its source row index.
    pub const ROW_SUFFIX: &str = "#";
}

/// Constants used by date-cell coercion.
pub mod dates {
    /// Text formats accepted for date cells, tried in order.
    pub const DATE_FORMATS: [&str; 5] = [
        "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y",
    ];
    /// Date-time formats produced by spreadsheet exports, tried after `DATE_FORMATS`.
    pub const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    /// Day zero of the 1900 spreadsheet serial date system.
    ///
    /// Accounts for the 1900 leap-year bug.
    pub const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
    /// Smallest serial number accepted as a date.
    pub const SERIAL_MIN: f64 = 1.0;
    /// Largest serial number accepted as a date (9999-12-31).
    pub const SERIAL_MAX: f64 = 2_958_465.0;
    /// Smallest serial accepted from a text cell (1910-01-01).
    ///
    /// Smaller integers in text cells are years or counts, not dates.
    pub const SERIAL_TEXT_MIN: f64 = 3_654.0;
}

/// Constants used by spreadsheet sources.
pub mod workbook {
    /// Worksheet holding the book table.
    pub const DEFAULT_SHEET: &str = "Shelf";
}

/// Constants used by the command-line runner.
pub mod app {
    /// Binary name used in CLI help output.
    pub const BIN_NAME: &str = "shelfview";
    /// Source id used when rows are provided in memory.
    pub const MEMORY_SOURCE_ID: &str = "memory";
}
