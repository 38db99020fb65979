//! Engine module: collaborators and CLI plumbing around the pipeline

pub mod arg_parser;
pub mod cli;
pub mod dates;
pub mod decoder;
pub mod progress;
pub mod server;
pub mod tools;
pub mod zinc;

// Re-export commonly used items
pub use arg_parser::{Cli, Commands, IngestArgs, SearchArgs, ServeArgs};
pub use cli::handle_run;
pub use dates::normalize_date;
pub use decoder::{DecodeError, HeaderBodyDecoder, MessageDecoder, header_value, split_message};
pub use tools::{
    check_root_and_canonicalize, glob_match, is_os_hidden_file, is_root_reserved_file,
    should_include_in_walk,
};
pub use server::{SharedStore, create_router, search_handler};
pub use zinc::{IndexStatus, IndexStore, IndexStoreError, ZincClient, index_schema, search_body};
