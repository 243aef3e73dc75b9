pub mod firebase_identity;
pub mod gemini;
pub mod mock;

pub use firebase_identity::FirebaseIdentityVerifier;
pub use gemini::GeminiClient;
pub use mock::{MockIdentityVerifier, MockTextGenerator};
