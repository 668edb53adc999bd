/*!
Moving platform coordinator.

- waypoints:   traversal state machine (travel, pause, ping-pong or cyclic) and easing
- passengers:  rider detection fans and the registry riders are resolved through
- controller:  per-frame ordering of rider moves around the platform's own translation
*/

pub mod controller;
pub mod passengers;
pub mod waypoints;

pub use controller::{PlatformController, PlatformStep};
pub use passengers::{PassengerMovement, PassengerRegistry, RiderClaims, detect_passengers};
pub use waypoints::{TraversalPhase, WaypointPath, ease};
