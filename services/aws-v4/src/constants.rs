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

// Headers used in aws services.
pub const X_AMZN_ERRORTYPE: &str = "x-amzn-errortype";

// Env values used in aws services.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const AWS_PROFILE: &str = "AWS_PROFILE";
pub const AWS_CONFIG_FILE: &str = "AWS_CONFIG_FILE";
pub const AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// Service name requests are signed for unless configured otherwise.
pub const DEFAULT_SERVICE: &str = "aps";

/// Error types reported in `x-amzn-errortype` when the session token expired.
pub const EXPIRED_TOKEN_ERROR_TYPES: &[&str] = &["ExpiredTokenException", "ExpiredToken"];

/// Headers that are forwarded but never signed.
///
/// Tracing systems are free to rewrite these between hops, which would break
/// the signature.
pub const UNSIGNED_TRACING_HEADERS: &[&str] = &[
    "uber-trace-id",
    "traceparent",
    "tracestate",
    "x-amzn-trace-id",
    "b3",
];

/// Prefix of the zipkin B3 multi-header propagation headers.
pub const UNSIGNED_TRACING_HEADER_PREFIX: &str = "x-b3-";
