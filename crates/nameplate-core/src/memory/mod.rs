mod environment;
pub mod layout;
mod process;
mod reader;
mod region;

#[cfg(test)]
pub mod mock;

pub use environment::EnvironmentBlock;
pub use process::*;
pub use reader::{ProcessEnvironment, ProcessProvider, QueryRegions, ReadMemory, TargetProcess};
pub use region::{MemoryRegion, MemoryState, RegionType, RegionWalker, protection};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
