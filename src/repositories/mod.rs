// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO event emission
// - NO cross-repository calls
// - Decoding is explicit, one function per collection

pub mod decode;
pub mod media_repository;
pub mod user_list_repository;

pub use decode::{DecodeError, DecodeObserver, LoggingDecodeObserver};
pub use media_repository::{decode_media, encode_media, MediaRepository};
pub use user_list_repository::{decode_user_list, UserListRepository};
