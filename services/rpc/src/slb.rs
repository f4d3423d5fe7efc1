// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Server Load Balancer calls.
//!
//! SLB accepts a narrow set of listener options. Unsupported choices are
//! rejected with a validation error before anything is sent.

use crate::{ApiCall, Category};
use alicloud_core::{Error, Result};
use std::fmt::{self, Display};

/// Protocol of a listener and of its health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerProtocol {
    /// Layer 7 HTTP.
    Http,
    /// Layer 7 HTTPS, needs a server certificate.
    Https,
    /// Layer 4 TCP.
    Tcp,
}

impl ListenerProtocol {
    fn action(&self) -> &'static str {
        match self {
            ListenerProtocol::Http => "CreateLoadBalancerHTTPListener",
            ListenerProtocol::Https => "CreateLoadBalancerHTTPSListener",
            ListenerProtocol::Tcp => "CreateLoadBalancerTCPListener",
        }
    }

    fn is_http(&self) -> bool {
        matches!(self, ListenerProtocol::Http | ListenerProtocol::Https)
    }
}

impl TryFrom<&str> for ListenerProtocol {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "HTTP" => Ok(ListenerProtocol::Http),
            "HTTPS" => Ok(ListenerProtocol::Https),
            "TCP" | "RAW_TCP" => Ok(ListenerProtocol::Tcp),
            _ => Err(Error::validation(format!(
                "unsupported listener protocol {value}, only HTTP, HTTPS and TCP are supported"
            ))),
        }
    }
}

impl Display for ListenerProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerProtocol::Http => f.write_str("HTTP"),
            ListenerProtocol::Https => f.write_str("HTTPS"),
            ListenerProtocol::Tcp => f.write_str("TCP"),
        }
    }
}

/// Backend scheduling algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduler {
    /// Weighted round robin.
    Wrr,
    /// Weighted least connections.
    Wlc,
}

impl TryFrom<&str> for Scheduler {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "wrr" | "round_robin" => Ok(Scheduler::Wrr),
            "wlc" | "least_conn" => Ok(Scheduler::Wlc),
            _ => Err(Error::validation(format!(
                "unsupported scheduler {value}, only wrr and wlc are supported"
            ))),
        }
    }
}

impl Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheduler::Wrr => f.write_str("wrr"),
            Scheduler::Wlc => f.write_str("wlc"),
        }
    }
}

/// Health check attached to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// Backend port probed.
    pub port: u16,
    /// Successes before a backend is healthy.
    pub healthy_threshold: u32,
    /// Failures before a backend is unhealthy.
    pub unhealthy_threshold: u32,
    /// Probe timeout in seconds.
    pub timeout: u32,
    /// Probe interval in seconds.
    pub interval: u32,
    /// Probe path, HTTP and HTTPS only.
    pub uri: String,
}

/// Listener to create on a load balancer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    /// Load balancer the listener belongs to.
    pub load_balancer_id: String,
    /// Listener protocol.
    pub protocol: ListenerProtocol,
    /// Public port.
    pub listener_port: u16,
    /// Backend server port.
    pub backend_port: u16,
    /// Scheduling algorithm, service default when unset.
    pub scheduler: Option<Scheduler>,
    /// Session cookie, HTTP and HTTPS only.
    pub sticky_cookie: Option<String>,
    /// Health check settings.
    pub health_check: Option<HealthCheck>,
    /// Server certificate, required for HTTPS.
    pub server_certificate_id: Option<String>,
}

// Seconds.
const PERSISTENCE_TIMEOUT: u32 = 0;
const COOKIE_TIMEOUT: u32 = 86400;

/// `CreateLoadBalancer` in `region`.
pub fn create_load_balancer(region: &str, name: &str) -> ApiCall {
    ApiCall::new(Category::Slb, "CreateLoadBalancer")
        .post()
        .with_param("RegionId", region)
        .with_param("LoadBalancerName", name)
        .with_param("AddressType", "internet")
}

/// `DescribeLoadBalancers` in `region`, optionally narrowed to one id.
pub fn describe_load_balancers(region: &str, load_balancer_id: Option<&str>) -> ApiCall {
    ApiCall::new(Category::Slb, "DescribeLoadBalancers")
        .with_param("RegionId", region)
        .with_optional_param("LoadBalancerId", load_balancer_id)
}

/// `DeleteLoadBalancer`.
pub fn delete_load_balancer(load_balancer_id: &str) -> ApiCall {
    ApiCall::new(Category::Slb, "DeleteLoadBalancer")
        .post()
        .with_param("LoadBalancerId", load_balancer_id)
}

/// The protocol specific `CreateLoadBalancer*Listener` call.
pub fn create_listener(listener: &Listener) -> Result<ApiCall> {
    let protocol = listener.protocol;
    if protocol == ListenerProtocol::Https && listener.server_certificate_id.is_none() {
        return Err(Error::validation("HTTPS listener requires a server certificate"));
    }
    if !protocol.is_http() && listener.sticky_cookie.is_some() {
        return Err(Error::validation(format!(
            "{protocol} listener does not support cookie persistence"
        )));
    }

    let mut call = ApiCall::new(Category::Slb, protocol.action())
        .post()
        .with_param("LoadBalancerId", &listener.load_balancer_id)
        .with_param("ListenerPort", listener.listener_port)
        .with_param("BackendServerPort", listener.backend_port)
        .with_optional_param("Scheduler", listener.scheduler)
        .with_optional_param("ServerCertificateId", listener.server_certificate_id.as_ref());

    call = match (protocol.is_http(), &listener.sticky_cookie) {
        (true, Some(cookie)) => call
            .with_param("StickySession", "on")
            .with_param("StickySessionType", "insert")
            .with_param("Cookie", cookie)
            .with_param("CookieTimeout", COOKIE_TIMEOUT),
        (true, None) => call.with_param("StickySession", "off"),
        (false, _) => call.with_param("PersistenceTimeout", PERSISTENCE_TIMEOUT),
    };

    call = match &listener.health_check {
        Some(hc) => {
            let call = call
                .with_param("HealthCheckConnectPort", hc.port)
                .with_param("HealthyThreshold", hc.healthy_threshold)
                .with_param("UnhealthyThreshold", hc.unhealthy_threshold)
                .with_param("HealthCheckConnectTimeout", hc.timeout)
                .with_param("HealthCheckInterval", hc.interval);
            if protocol.is_http() {
                call.with_param("HealthCheck", "on")
                    .with_param("HealthCheckDomain", "$_ip")
                    .with_param("HealthCheckURI", &hc.uri)
                    .with_param("HealthCheckHttpCode", "http_2xx")
            } else {
                call
            }
        }
        None if protocol.is_http() => call.with_param("HealthCheck", "off"),
        None => call,
    };

    Ok(call)
}

/// `StartLoadBalancerListener`, listeners are created stopped.
pub fn start_listener(load_balancer_id: &str, listener_port: u16) -> ApiCall {
    ApiCall::new(Category::Slb, "StartLoadBalancerListener")
        .post()
        .with_param("LoadBalancerId", load_balancer_id)
        .with_param("ListenerPort", listener_port)
}
