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

// Headers
pub const X_OSS_ACL: &str = "x-oss-acl";
pub const X_OSS_COPY_SOURCE: &str = "x-oss-copy-source";
pub const X_OSS_COPY_SOURCE_RANGE: &str = "x-oss-copy-source-range";
pub const X_OSS_REQUEST_ID: &str = "x-oss-request-id";
pub const X_OSS_SECURITY_TOKEN: &str = "x-oss-security-token";
pub const CONTENT_MD5: &str = "content-md5";

// Presigned query parameters
pub const OSS_ACCESS_KEY_ID: &str = "OSSAccessKeyId";
pub const EXPIRES: &str = "Expires";
pub const SIGNATURE: &str = "Signature";
pub const SECURITY_TOKEN: &str = "security-token";

// Canned ACLs
pub const ACL_PRIVATE: &str = "private";
pub const ACL_PUBLIC_READ: &str = "public-read";
pub const ACL_PUBLIC_READ_WRITE: &str = "public-read-write";

/// Objects at least this large are copied part by part: 1 GiB.
pub const MULTIPART_COPY_THRESHOLD: u64 = 1 << 30;
/// Size of each copied part: 500 MiB.
pub const MULTIPART_COPY_PART_SIZE: u64 = 524_288_000;
/// Default `max-keys` of list requests.
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Most parts a multipart upload may hold.
pub const MAX_MULTIPART_PARTS: u64 = 10_000;
