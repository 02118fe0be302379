pub mod operation_executor;

pub use operation_executor::{ExecutionMode, OperationExecutor};
