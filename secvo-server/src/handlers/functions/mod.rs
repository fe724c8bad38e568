pub mod scan_url;
