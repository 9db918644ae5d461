mod entry;
mod line_index;
mod section;
mod table;

pub use entry::IniEntry;
pub use line_index::LineIndex;
pub use section::IniSection;
pub use table::ValueTable;
