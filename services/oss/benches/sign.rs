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

use alicloud_core::time::parse_rfc3339;
use alicloud_core::{Context, Signer};
use alicloud_credential::StaticCredentialProvider;
use alicloud_oss::{Bucket, RequestSigner};
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use std::time::Duration;

criterion_group!(benches, bench);
criterion_main!(benches);

fn request() -> http::request::Parts {
    let (mut parts, _) = http::Request::builder()
        .method("PUT")
        .uri("https://examplebucket.oss-cn-hangzhou.aliyuncs.com/dir/big.bin?partNumber=2&uploadId=0004B9894A22E5B1888A1E29F823")
        .header("x-oss-copy-source", "/src/big.bin")
        .header("x-oss-copy-source-range", "bytes=524288000-1048575999")
        .body(())
        .expect("request must be valid")
        .into_parts();
    parts.extensions.insert(Bucket("examplebucket".to_string()));
    parts
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("oss");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime must build");

    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new("access_key_id", "access_key_secret"),
        RequestSigner::new()
            .with_time(parse_rfc3339("2022-03-01T08:12:34Z").expect("time must be valid")),
    );

    group.bench_function("header_sign", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut parts = request();
            signer.sign(&mut parts, None).await.expect("must success")
        })
    });
    group.bench_function("query_sign", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut parts = request();
            signer
                .sign(&mut parts, Some(Duration::from_secs(3600)))
                .await
                .expect("must success")
        })
    });

    group.finish();
}
