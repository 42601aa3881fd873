pub mod validating_http_downloader;
