//! Batch generation and reduction of stills.
//!
//! A batch of stills is generated up front, then narrowed down by a chain of
//! reducers. Files a reducer drops are deleted from disk.

mod command;
mod dupes;
mod pipeline;
mod reducer;
mod screening;
mod stills;

pub use command::{CommandReducer, CommandReducerConfig};
pub use dupes::{DupesReducer, published_names};
pub use pipeline::{BatchOutcome, BatchPipeline, StageReport};
pub use reducer::{Reducer, parse_reducer_output};
pub use screening::ScreeningReducer;
pub use stills::{
    BATCH_END_RATIO, BATCH_START_RATIO, DEFAULT_BATCH_SIZE, StillBatch, StillBatchConfig,
};
