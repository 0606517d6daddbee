//! Text measurement example.
//!
//! Measures a paragraph with the system fonts, first directly and then
//! through a measurement worker fed with JSON requests.
//!
//! Run with: cargo run -p horizon-lattice-textmetrics --example measure

use horizon_lattice_textmetrics::cosmic::CosmicMeasurer;
use horizon_lattice_textmetrics::worker::MeasureRequest;
use horizon_lattice_textmetrics::{MeasureConfig, TextMeasurer, TextStyle, WhiteSpace};

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog.\n\
                         Pack my box with five dozen liquor jugs.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Text measurement example");
    println!("========================");
    println!();

    let mut measurer = TextMeasurer::new(CosmicMeasurer::new());
    println!(
        "Font system loaded {} faces",
        measurer.measurer().font_system().face_count()
    );

    let style = TextStyle::builder()
        .font_family("Helvetica, Arial, sans-serif")
        .font_size(18.0)
        .white_space(WhiteSpace::Normal)
        .word_wrap(true)
        .word_wrap_width(220.0)
        .build();

    let metrics = measurer.measure(PARAGRAPH, &style, false)?;
    println!("Font: {}", style.to_font_string());
    println!(
        "Ascent {} / descent {} / size {}",
        metrics.font_properties.ascent,
        metrics.font_properties.descent,
        metrics.font_properties.font_size
    );
    for (line, width) in metrics.lines.iter().zip(&metrics.line_widths) {
        println!("  {width:7.2}px | {line}");
    }
    println!("Box: {:.2} x {:.2}", metrics.width, metrics.height);
    println!();

    // Off-thread measurement with a default configuration
    let worker = MeasureConfig::default().spawn_worker()?;
    let request = MeasureRequest::from_json(
        r#"{"type": "CANVAS_MEASURE", "text": "Hello, worker", "fontFamily": "serif", "fontSize": "24px"}"#,
    )?;
    let id = worker.submit(request)?;
    let response = worker.recv()?;
    println!("Worker response {id}: {}", response.to_json()?);

    worker.stop_and_join();
    Ok(())
}
