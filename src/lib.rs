pub mod assembler;
pub mod classifier;
pub mod emitter;
pub mod index;
pub mod osm;
pub mod parallel_assembler;
pub mod pipeline;
pub mod reader;
pub mod resolver;

pub use assembler::*;
pub use classifier::*;
pub use emitter::*;
pub use index::*;
pub use osm::*;
pub use parallel_assembler::*;
pub use pipeline::*;
pub use reader::*;
pub use resolver::*;
