use clap::Parser;
use geojson::GeoJson;
use linework_polygonize::geojson_io::{polygonize_document, polygons_to_geojson};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input GeoJSON file (noded LineStrings)
    #[arg(short, long)]
    input: PathBuf,

    /// Output GeoJSON file (Polygons)
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Read Input
    println!("Reading input from {:?}", args.input);
    let file = File::open(&args.input)?;
    let reader = BufReader::new(file);
    let geojson: GeoJson = serde_json::from_reader(reader)?;

    println!("Running polygonizer...");
    let polygons = polygonize_document(geojson)?;
    let holes: usize = polygons.iter().map(|p| p.interiors().len()).sum();
    println!("Found {} polygons with {} holes.", polygons.len(), holes);

    // Write Output
    let file = File::create(&args.output)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &polygons_to_geojson(&polygons))?;

    println!("Wrote output to {:?}", args.output);

    Ok(())
}
