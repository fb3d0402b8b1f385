use rs_nlm_core::model::builder::ChainBuilder;
use rs_nlm_core::model::symbol::{to_symbols, Symbol};
use rs_nlm_core::{CorpusLoader, CorpusModel, Document, ModelConfig, NlmError, StaticCorpus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A single chain: every 5-character window of the alphabet has exactly one
    // successor, so the walk replays the training text and stops at its end
    let mut builder = ChainBuilder::new(5)?;
    builder.add_text("abcdefghijklmnopqrstuvwxyz", Symbol::EndOfDocument);
    let chain = builder.compile();
    let walk = chain.generate_text(&to_symbols("lmnop"), 50, &mut rand::rng());
    println!("Replayed: {}", walk.join(""));

    // Load the built-in corpus. A 'DirectoryCorpus' reads '.txt' files instead
    let documents = StaticCorpus::lorem_ipsum().load_corpus()?;

    // Titles and paragraphs shorter than their chain order are rejected
    let config = ModelConfig { title_order: 5, content_order: 6 };
    let bad = vec![Document::new("Tiny", ["A paragraph long enough."])];
    match CorpusModel::train(config, &bad) {
        Err(e @ NlmError::TrainingData { .. }) => println!("Rejected corpus: {e}"),
        _ => println!("Should not happen"),
    }

    // Train both chains once, then generate as many articles as needed
    let model = CorpusModel::train(config, &documents)?;
    for i in 0..3 {
        let article = model.generate(120, 600);
        println!("\n=== Article {}: {}", i + 1, article.title);
        for paragraph in &article.paragraphs {
            println!("\n{paragraph}");
        }
    }

    Ok(())
}
