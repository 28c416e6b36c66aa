//! CLI subcommand implementations.

pub mod gray;
pub mod info;
pub mod outline;
pub mod split;

pub use gray::CmdGray;
pub use info::CmdInfo;
pub use outline::CmdOutline;
pub use split::CmdSplit;
