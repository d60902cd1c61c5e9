pub mod bc;
pub mod forks;
pub mod init;
pub mod report;
pub mod sync;
pub mod util;

pub use bc::*;
pub use forks::*;
pub use init::*;
pub use report::*;
pub use sync::*;
pub use util::*;
