use anyhow::anyhow;
use bytes::Bytes;
use hex::FromHex;
use hyper::{Body, Client, HeaderMap, Request, Uri};
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::USER_AGENT;
use hyper_tls::HttpsConnector;
use sha1::{Digest, Sha1};
use tracing::trace;

/// Maven Central returns a 403 without a user agent
const USER_AGENT_VALUE: &str = concat!("license-audit/", env!("CARGO_PKG_VERSION"));

/// Downloads files relative to a fixed base URI, checking the body's integrity against the
///  checksums a repository announces in its response headers.
///
/// Instances do HTTP connection caching internally, so keeping them alive has performance benefits.
pub struct ValidatingHttpDownloader {
    client: Client<HttpsConnector<HttpConnector>>,
    base_uri: String, // with trailing '/'
}
impl ValidatingHttpDownloader {
    pub fn new(base_uri: String) -> anyhow::Result<ValidatingHttpDownloader> {
        let mut base_uri = base_uri;
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }

        // check that the base URI is valid
        Uri::try_from(base_uri.clone())?;

        Ok(ValidatingHttpDownloader {
            client: Client::builder()
                .build::<_, Body>(HttpsConnector::new()),
            base_uri,
        })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// The whole body, after it was validated against all announced checksums. This is meant
    ///  for small files like POMs.
    pub async fn get(&self, path: &str) -> anyhow::Result<Bytes> {
        let uri = format!("{}{}", self.base_uri, path);
        let request = Request::builder()
            .method("GET")
            .uri(Uri::try_from(uri.clone())?)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(Body::empty())?;

        trace!("getting {:?}", request);

        let response = self.client.request(request)
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("GET {} failed: {}", uri, response.status()));
        }

        let checksums = expected_checksums(response.headers())?;
        let body = to_bytes(response.into_body())
            .await?;

        for checksum in &checksums {
            trace!("validating {:?} for {}", checksum, uri);
            checksum.verify(&body)
                .map_err(|e| anyhow!("{}: {}", uri, e))?;
        }
        Ok(body)
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedChecksum {
    Sha1([u8; 20]),
    Md5([u8; 16]),
}
impl ExpectedChecksum {
    pub fn verify(&self, data: &[u8]) -> anyhow::Result<()> {
        let is_valid = match self {
            ExpectedChecksum::Sha1(expected) => Sha1::digest(data).as_slice() == expected.as_slice(),
            ExpectedChecksum::Md5(expected) => &md5::compute(data).0 == expected,
        };

        if is_valid {
            Ok(())
        }
        else {
            Err(anyhow!("failed validation against {:?}", self))
        }
    }
}

/// Checksums announced by Artifactory / Nexus style headers, Google Cloud Storage metadata, or
///  an etag that happens to be a SHA1 hash (Maven Central). An explicitly announced checksum
///  that can not be parsed is an error, an etag that is no SHA1 is ignored.
pub fn expected_checksums(headers: &HeaderMap) -> anyhow::Result<Vec<ExpectedChecksum>> {
    let header_str = |name: &str| headers.get(name)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim());

    let mut result = vec![];

    let explicit_sha1 = header_str("x-checksum-sha1")
        .or_else(|| header_str("x-goog-meta-checksum-sha1"));
    if let Some(sha1) = explicit_sha1 {
        result.push(ExpectedChecksum::Sha1(<[u8; 20]>::from_hex(sha1)?));
    }
    else if let Some(etag) = header_str("etag") {
        let etag = etag.trim_start_matches("W/").trim_matches('"');
        if let Ok(sha1) = <[u8; 20]>::from_hex(etag) {
            result.push(ExpectedChecksum::Sha1(sha1));
        }
    }

    let md5 = header_str("x-checksum-md5")
        .or_else(|| header_str("x-goog-meta-checksum-md5"));
    if let Some(md5) = md5 {
        result.push(ExpectedChecksum::Md5(<[u8; 16]>::from_hex(md5)?));
    }

    Ok(result)
}
