/* demos/usage.rs */

use std::path::Path;

use http::{HeaderValue, Request, header};
use static_app::{DirectoryResponder, FileOptions, FileResponder, conditional, mime};

fn main() -> Result<(), static_app::Error> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

	let root = std::env::current_dir().expect("failed to get current directory");
	let site = DirectoryResponder::with_options(
		&root,
		FileOptions::new().header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
	)?;
	println!("Serving {}", site.root().as_str());

	for uri in ["/src/lib.rs", "/../etc/passwd", "/missing.txt"] {
		let request = Request::get(uri).body(()).expect("valid request");
		let response = site.respond(&request);
		println!("GET {uri} -> {}", response.status());
	}

	let request = Request::get("/")
		.header(header::RANGE, "bytes=0-63")
		.body(())
		.expect("valid request");
	let served = FileResponder::new(root.join("Cargo.toml")).respond(&request);
	let response = conditional::respond(&request, served);
	println!(
		"Range -> {} {:?}",
		response.status(),
		response.headers().get(header::CONTENT_RANGE)
	);
	let head = response.into_body().read_to_end().unwrap_or_default();
	println!("{}", String::from_utf8_lossy(&head));

	let guess = mime::guess(Path::new("bundle.js.gz"));
	println!("MIME: {:?} / {:?}", guess.content_type, guess.content_encoding);
	Ok(())
}
