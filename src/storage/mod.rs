//! Storage module for wallet persistence

pub mod persistence;

pub use persistence::{
    load_config, load_from_file, save_to_file, Storage, StorageConfig, StorageError,
};
