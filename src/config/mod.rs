/// How numeric text is turned into INTEGER/FLOAT bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// `atoi`/`atof` conventions: the longest numeric prefix is used and text
    /// without one encodes as zero.
    #[default]
    Lenient,
    /// Reject any text that is not entirely a number.
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionConfig {
    pub parse_mode: ParseMode,
}

impl ExecutionConfig {
    pub fn strict() -> Self {
        ExecutionConfig {
            parse_mode: ParseMode::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeapConfig {
    /// Upper bound on concurrently open scan handles.
    pub max_open_scans: usize,
    /// Used to derive the page part of a record id.
    pub records_per_page: u32,
    /// Records a single relation may hold. None => unbounded.
    pub max_records_per_relation: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        HeapConfig {
            max_open_scans: 16,
            records_per_page: 64,
            max_records_per_relation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseOptions {
    pub execution: ExecutionConfig,
    pub heap: HeapConfig,
}
