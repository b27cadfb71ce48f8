//! Output encoders: Prometheus rules YAML, a Kubernetes `PrometheusRule`
//! resource, and an OpenSLO-flavoured document.

pub mod kubernetes;
pub mod openslo;
pub mod prometheus;
