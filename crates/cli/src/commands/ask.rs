//! `forgecore ask`: Knowledge base lookup.

use forgecore_tools::KnowledgeBase;

use super::load_config;

pub async fn run(question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let kb = KnowledgeBase::load(config.knowledge.path.as_deref());
    println!("{}", kb.answer(question));
    Ok(())
}
