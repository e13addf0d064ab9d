pub mod line;
pub mod op;
pub mod reg;

pub use line::{Line, Op};
pub use op::OpKind;
pub use reg::Reg;
