// MIT License - Copyright (c) 2026 Peter Wright
// Session keep-alive around upstream calls

/// Run `keep_alive` followed by `$call` against `$upstream`.
///
/// If either step reports an expired session, authenticate once and retry
/// `$call` once. Any other error is returned as is.
macro_rules! with_session {
    ($upstream:expr, $call:expr) => {{
        let first = match $upstream.keep_alive().await {
            Ok(()) => $call.await,
            Err(e) => Err(e),
        };
        match first {
            Err(e) if e.is_session_expired() => {
                tracing::warn!("Session expired, re-authenticating");
                match $upstream.authenticate().await {
                    Ok(()) => $call.await,
                    Err(auth) => Err(auth),
                }
            }
            other => other,
        }
    }};
}

pub(crate) use with_session;
