// Topology extraction
//
// Recovers the network-exposed services of a program and the listeners they
// are bound to, plus any module-level scheduled tasks.

pub mod extractor;
pub mod listener;
pub mod path;
pub mod schedule;

pub use extractor::{ResourceInfo, ServiceInfo, Topology, TopologyExtractor};
pub use listener::{
    ListenerInfo, ListenerProtocol, ListenerRef, ListenerResolver, PortSource, Resolution,
    SecureSocketConfig, Transport,
};
pub use schedule::{Schedule, TaskInfo};
