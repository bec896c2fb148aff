//! The `eiscore init` command.

use std::path::Path;

use anyhow::Result;

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    let path = Path::new(path);
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    println!("Created {}", path.display());
    Ok(())
}

pub fn execute() -> Result<()> {
    write_if_missing("eiscore.toml", SAMPLE_CONFIG)?;
    write_if_missing("lexicon.toml", SAMPLE_LEXICON)?;
    write_if_missing("items/example.toml", EXAMPLE_ITEMS)?;

    println!("\nNext steps:");
    println!("  1. Point eiscore.toml at a CoreNLP server, or extend lexicon.toml");
    println!("  2. Run: eiscore validate --items items/example.toml");
    println!(
        "  3. Run: eiscore score --items items/example.toml --item passive-allow \"Children should not allowed to stay out late with their friends.\""
    );

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# eiscore configuration

parallelism = 4
max_retries = 3
retry_delay_ms = 500
output_dir = "./eiscore-results"

# Offline tagging from a word list. Swap for the CoreNLP block below to tag
# with a running server (java -mx4g edu.stanford.nlp.pipeline.StanfordCoreNLPServer).
[annotator]
type = "lexicon"
path = "lexicon.toml"

# [annotator]
# type = "corenlp"
# base_url = "${EISCORE_CORENLP_URL}"
# timeout_secs = 30
"#;

const SAMPLE_LEXICON: &str = r#"# Words the lexicon annotator knows. Anything else is tagged NN.
# Forms of "be" are built in.

[words]
allowed = { lemma = "allow", pos = "VBN" }
allow = { lemma = "allow", pos = "VB" }
allows = { lemma = "allow", pos = "VBZ" }
agreed = { lemma = "agree", pos = "VBN" }
permitted = { lemma = "permit", pos = "VBN" }
should = { lemma = "should", pos = "MD" }
not = { lemma = "not", pos = "RB" }
to = { lemma = "to", pos = "TO" }
stay = { lemma = "stay", pos = "VB" }
loves = { lemma = "love", pos = "VBZ" }
love = { lemma = "love", pos = "VBP" }
loved = { lemma = "love", pos = "VBD" }
likes = { lemma = "like", pos = "VBZ" }
like = { lemma = "like", pos = "VBP" }
read = { lemma = "read", pos = "VB" }
"#;

const EXAMPLE_ITEMS: &str = r#"[item_bank]
id = "example"
name = "Example items"
description = "One be-passive and one third-person-singular item to get started"
default_scale = "graded"

[[items]]
id = "passive-allow"
name = "Children allowed"
construct = "be-passive"
target = "Children should not be allowed to stay out late with their friends."
lemma = "allow"
form = "be"

[[items]]
id = "3sg-love"
name = "Everyone loves"
construct = "third-person-singular"
target = "Everyone loves to read comic books as a child."
lemma = "love"
form = "loves"
"#;
