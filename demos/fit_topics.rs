use plsa::{ConditionalPlsa, Corpus, EngineConfig, FitConfig, Pipeline, SymmetricPlsa, Weighting};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two themes with disjoint vocabularies; a 2-topic model should find them.
    let docs = [
        "The borrow checker rejects a dangling reference in the compiler.",
        "Cargo builds the crate and the compiler checks every lifetime.",
        "A crate exports traits; the borrow checker enforces lifetime rules.",
        "Knead the dough, let the yeast rise, then bake the bread in the oven.",
        "Flour, water and yeast make bread dough; the oven does the rest.",
        "Bake at high heat: a hot oven gives bread a crisp crust.",
    ];
    let pipeline = Pipeline::new()
        .with_min_word_len(3)
        .with_stopwords(["the", "and", "then", "does", "gives", "make", "every", "let"]);
    let corpus = Corpus::from_documents(docs, pipeline)?;
    println!("{corpus}\n");

    let fit = FitConfig::default();

    let mut symmetric = SymmetricPlsa::new(&corpus, &EngineConfig::new(2).with_seed(7))?;
    let result = symmetric.best_of(3, &fit)?;
    println!("{symmetric}\n");
    println!("{result}");
    for t in 0..result.n_topics() {
        let words: Vec<&str> = result
            .top_words(t, 4)
            .unwrap_or_default()
            .iter()
            .map(|(w, _)| w.as_str())
            .collect();
        println!("  topic {t} (p={:.3}): {}", result.topic()[t], words.join(", "));
    }

    let config = EngineConfig::new(2)
        .with_seed(7)
        .with_weighting(Weighting::TfIdf);
    let mut conditional = ConditionalPlsa::new(&corpus, &config)?;
    let result = conditional.fit(&fit)?;
    println!("\n{conditional}");
    println!(
        "final KL divergence after {} recorded iterations: {:.6}",
        result.convergence().len(),
        result.kl_divergence()
    );

    let prediction = result.predict("Fresh bread from a wood oven, served with pizza.")?;
    println!("prediction: {:?}", prediction.topic.to_vec());
    println!(
        "unknown words ({}): {:?}",
        prediction.n_unknown_words, prediction.unknown_words
    );

    Ok(())
}
