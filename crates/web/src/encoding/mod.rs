//! Response content negotiation.
//!
//! Only `gzip` is offered. It is chosen when the request's `Accept-Encoding`
//! lists the exact token `gzip`; quality values are not interpreted.

mod encoder;

pub use encoder::accepts_gzip;
pub use encoder::encode;
pub use encoder::gzip;

pub const GZIP: &str = "gzip";
