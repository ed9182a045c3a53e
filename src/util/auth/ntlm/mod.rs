pub use ntlm_auth_provider::NTLMAuthProvider;
pub use ntlm_authenticate_message::NTLMAuthenticateMessageBody;
pub use ntlm_challenge_message::NTLMChallengeMessageBody;
pub use ntlm_message::{
    encode_av_pairs, parse_av_pairs, AvId, AvPair, NTLMMessage, NTLMNegotiateFlags,
};
pub use ntlm_negotiate_message::NTLMNegotiateMessageBody;

mod ntlm_auth_provider;
mod ntlm_authenticate_message;
mod ntlm_challenge_message;
mod ntlm_message;
mod ntlm_negotiate_message;
