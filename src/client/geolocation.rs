use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;
use crate::models::restaurant::Coordinates;

/// New York City, used whenever the device can't tell us where it is.
pub const FALLBACK_COORDINATES: Coordinates = Coordinates { lat: 40.7128, lng: -74.0060 };
pub const DEFAULT_POSITION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationUnavailable {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Geolocation is not supported")]
    Unsupported,
    #[error("Timed out waiting for a position")]
    Timeout,
    #[error("Position unavailable")]
    PositionUnavailable,
}

/// Something that can report where the device currently is.
pub trait PositionSource {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Coordinates, GeolocationUnavailable>> + Send;
}

/// A position known up front, e.g. passed on the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedPosition(pub Coordinates);

impl PositionSource for FixedPosition {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Coordinates, GeolocationUnavailable>> + Send {
        let coordinates = self.0;
        async move { Ok(coordinates) }
    }
}

/// `None` stands for a device without the capability at all.
impl<S: PositionSource + Sync> PositionSource for Option<S> {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Coordinates, GeolocationUnavailable>> + Send {
        async move {
            match self {
                Some(source) => source.current_position().await,
                None => Err(GeolocationUnavailable::Unsupported),
            }
        }
    }
}

/// Resolves the device location once per session and caches it.
///
/// Resolution never fails: any error, timeout or missing capability silently
/// becomes [`FALLBACK_COORDINATES`].
pub struct GeolocationResolver<S> {
    source: S,
    timeout: Duration,
    resolved: OnceCell<Coordinates>,
}

impl<S: PositionSource> GeolocationResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: DEFAULT_POSITION_TIMEOUT,
            resolved: OnceCell::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn resolve(&self) -> Coordinates {
        *self
            .resolved
            .get_or_init(|| async {
                let outcome = tokio::time::timeout(self.timeout, self.source.current_position())
                    .await
                    .unwrap_or(Err(GeolocationUnavailable::Timeout));

                match outcome {
                    Ok(position) if position.lat.is_finite() && position.lng.is_finite() => {
                        debug!("Got user location: {:?}", position);
                        position
                    }
                    Ok(position) => {
                        debug!("Ignoring unusable position {:?}, using NYC fallback", position);
                        FALLBACK_COORDINATES
                    }
                    Err(e) => {
                        debug!("{}, using NYC fallback", e);
                        FALLBACK_COORDINATES
                    }
                }
            })
            .await
    }

    /// Location resolved so far, if any. Never waits.
    pub fn current(&self) -> Option<Coordinates> {
        self.resolved.get().copied()
    }

    pub fn current_or_fallback(&self) -> Coordinates {
        self.current().unwrap_or(FALLBACK_COORDINATES)
    }
}
