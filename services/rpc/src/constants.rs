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

// Framework parameters of a query signed call.
pub const ACTION: &str = "Action";
pub const VERSION: &str = "Version";
pub const ACCESS_KEY_ID: &str = "AccessKeyId";
pub const TIMESTAMP: &str = "Timestamp";
pub const SIGNATURE_METHOD: &str = "SignatureMethod";
pub const SIGNATURE_VERSION: &str = "SignatureVersion";
pub const SIGNATURE_NONCE: &str = "SignatureNonce";
pub const FORMAT: &str = "Format";
pub const SECURITY_TOKEN: &str = "SecurityToken";
pub const SIGNATURE: &str = "Signature";
pub const REGION_ID: &str = "RegionId";

pub const HMAC_SHA1: &str = "HMAC-SHA1";
pub const SIGNATURE_VERSION_1_0: &str = "1.0";
pub const FORMAT_JSON: &str = "JSON";

// Header carrying the request id when the body has none.
pub const X_ACS_REQUEST_ID: &str = "x-acs-request-id";
