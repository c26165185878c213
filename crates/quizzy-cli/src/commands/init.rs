//! The `quizzy init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizzy.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("topics")?;
    write_if_missing(Path::new("topics/sample.csv"), SAMPLE_TOPIC)?;

    println!("\nNext steps:");
    println!("  1. Add your own <topic>.csv files to topics/");
    println!("  2. Run: quizzy validate --dir topics");
    println!("  3. Run: quizzy take --topic sample");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizzy configuration

topics_dir = "topics"
shuffle_questions = false
shuffle_options = true
paging = "sequential"
output_dir = "./quizzy-results"

# Uncomment to record results with `quizzy take --record`.
# [store]
# type = "jsonl"
# path = "./quizzy-results/attempts.jsonl"
#
# [store]
# type = "http"
# base_url = "https://<project>.firebaseio.com"
# auth_token = "${QUIZZY_STORE_TOKEN}"
"#;

const SAMPLE_TOPIC: &str = r#"question,option1,option2,option3,option4,correct_answer
Which keyword declares an immutable binding in Rust?,let,var,const mut,static mut,let
What does `cargo build --release` enable?,Debug assertions,Optimizations,Incremental tests,Doc generation,Optimizations
Which type owns a growable UTF-8 string?,&str,String,char,Box<str>,String
"How many owners can a value have at a time, without Rc?",Zero,One,Two,Unlimited,One
"#;
