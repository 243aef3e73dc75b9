pub mod conversation_repository;
pub mod identity_verifier;
pub mod text_generator;
pub mod user_repository;
