// Purpose: the FM voice and the plumbing that drives it from another thread

pub mod handle;
pub mod message;
pub mod voice;

pub use handle::SharedFmVoice;
#[cfg(feature = "rtrb")]
pub use handle::VoiceHandle;
pub use message::{MessageReceiver, VoiceMessage};
