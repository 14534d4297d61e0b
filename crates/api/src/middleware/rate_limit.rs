//! Per-client request rate limiting.
//!
//! A sliding-window limiter keyed by client IP. The client address is taken
//! from `X-Forwarded-For` (first hop), then `X-Real-IP`, then the socket peer.
//! Requests over budget receive `429 RATE_LIMITED`.
//!
//! The limiter does not prune itself; [`crate::background::rate_limit_sweep`]
//! calls [`RateLimiter::cleanup`] on a fixed interval.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;
use crate::state::AppState;

/// In-memory sliding-window rate limiter.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    state: RwLock<HashMap<IpAddr, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Record a request from `ip`. Returns `false` when the client is over budget.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let cutoff = now.checked_sub(self.window).unwrap_or(now);

        {
            let state = self
                .state
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(timestamps) = state.get(&ip) {
                let recent = timestamps.iter().filter(|&&t| t > cutoff).count();
                if recent >= self.max_requests {
                    tracing::warn!(%ip, requests = recent, max = self.max_requests, "Rate limit exceeded");
                    return false;
                }
            }
        }

        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let timestamps = state.entry(ip).or_default();
        timestamps.retain(|&t| t > cutoff);

        // Another request may have landed between the two locks.
        if timestamps.len() >= self.max_requests {
            tracing::warn!(%ip, requests = timestamps.len(), max = self.max_requests, "Rate limit exceeded");
            return false;
        }

        timestamps.push(now);
        true
    }

    /// Drop clients idle for two windows and prune stale timestamps of the rest.
    ///
    /// Returns the number of clients removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let cutoff = now.checked_sub(self.window).unwrap_or(now);
        let idle_cutoff = now.checked_sub(self.window * 2).unwrap_or(now);

        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = state.len();
        state.retain(|_, timestamps| {
            let last_seen = timestamps.last().copied();
            timestamps.retain(|&t| t > cutoff);
            last_seen.is_some_and(|t| t > idle_cutoff)
        });
        before - state.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

/// Resolve the client address for rate limiting.
///
/// Falls back to `0.0.0.0` when no header or peer address is available
/// (e.g. requests driven directly through the router in tests).
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    };

    forwarded
        .or_else(real_ip)
        .or_else(|| peer.map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Axum middleware enforcing the shared [`RateLimiter`].
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    if !state.rate_limiter.check(ip) {
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}
