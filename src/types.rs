/// Identifier for the tabular source records were loaded from.
/// Examples: `data/Books.csv`, `memory`
pub type SourceId = String;
/// Header name of a source column.
/// Examples: `Title`, `Sub-Category`, `Cover`
pub type ColumnName = String;
/// Book title, taken verbatim from the source.
/// Example: `The Name of the Rose`
pub type Title = String;
/// Top-level category label.
/// Examples: `Fiction`, `History`
pub type CategoryLabel = String;
/// Optional second-level grouping under a category.
/// Examples: `Medieval`, `Sci-Fi`
pub type SubCategoryLabel = String;
/// Reading status label from an open set.
/// Examples: `Read`, `Reading`, `To-Read`, `Abandoned`
pub type StatusLabel = String;
/// Raw cell text before coercion.
/// Examples: `2024-01-01`, `8.5`, `45292`
pub type CellText = String;
/// Stable node identifier inside a composition tree.
/// Examples: `Fiction`, `Fiction/Sci-Fi`, `Fiction/Sci-Fi/Dune#3`
pub type NodeId = String;
