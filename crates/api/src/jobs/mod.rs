//! Background job processing.
//!
//! Each submitted job gets its own Tokio task spawned at submission
//! time; the processor drives the job to a terminal state and never
//! lets an error escape the task.

pub mod processor;
