pub mod backlinks;
pub mod filename_index;
pub mod frontmatter;
pub mod link_parser;
pub mod matching;
pub mod pathguard;
pub mod resolver;
pub mod rewrite;
pub mod scanner;
pub mod store;
pub mod title;

pub use backlinks::{Backlink, SnippetOptions};
pub use filename_index::FilenameIndex;
pub use link_parser::WikilinkToken;
pub use pathguard::PathError;
pub use resolver::{Resolution, ResolutionVerdict};
pub use scanner::{FsVault, MemoryVault, NoteRecord, NoteSource, ScanError};
pub use store::{IndexError, IndexStore, VaultSnapshot};
