//! Run with: cargo run -p introskip-detect --example detect -- <url> [title] [body]
//!
//! Extracts a media context from the given page signals and prints it.

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("usage: detect <url> [title] [body]");
        std::process::exit(2);
    };
    let title = args.next().unwrap_or_default();
    let body = args.next().unwrap_or_default();

    let ctx = introskip_detect::extract(&url, &title, &body, 0.0);
    println!("Title:    {}", ctx.title);
    println!("Kind:     {}", ctx.kind);
    if let Some(id) = ctx.catalog_id {
        println!("Catalog:  {id}");
    }
    if let (Some(s), Some(e)) = (ctx.season, ctx.episode) {
        println!("Episode:  S{s:02}E{e:02}");
    }
    if let Some(id) = ctx.episode_id {
        println!("Ep. id:   {id}");
    }
    if let Some(year) = &ctx.release_year {
        println!("Year:     {year}");
    }
}
