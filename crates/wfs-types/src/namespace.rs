//! Namespace URIs of the OGC and W3C schemas the WFS 2.0 model draws on.

/// WFS 2.0 target namespace.
pub const WFS: &str = "http://www.opengis.net/wfs/2.0";

/// Filter Encoding 2.0.
pub const FES: &str = "http://www.opengis.net/fes/2.0";

/// GML 3.2.
pub const GML: &str = "http://www.opengis.net/gml/3.2";

/// OWS Common 1.1.
pub const OWS: &str = "http://www.opengis.net/ows/1.1";

/// XLink.
pub const XLINK: &str = "http://www.w3.org/1999/xlink";

/// XML Schema instance (`xsi:schemaLocation`).
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The empty namespace used by unqualified attributes and text runs.
pub const NONE: &str = "";
