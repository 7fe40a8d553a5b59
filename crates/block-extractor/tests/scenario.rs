//! End-to-end tests over realistic kernel-flavored sources.

use pretty_assertions::assert_eq;
use variability_block_extractor::{
    Block, BlockExtractor, ExtractorConfig, InvalidConditionHandling, PARSING_ERROR_VARIABLE,
};
use variability_logic::Formula;

const VORTEX_FIFO: &str = include_str!("data/vortex_fifo.c");

fn block(start_line: usize, end_line: usize, condition: Formula, presence: Formula) -> Block {
    Block::new("vortex_fifo.c", start_line, end_line, condition, presence)
}

#[test]
fn kernel_style_file_with_comment_and_continuation_interplay() {
    let extractor = BlockExtractor::default();
    let blocks = extractor.extract_str(VORTEX_FIFO, "vortex_fifo.c").unwrap();

    let guard = Formula::not("CHIP_AU8810");

    let mut outer = block(8, 33, guard.clone(), guard.clone());
    outer.children.push(block(
        12,
        13,
        Formula::var("CHIP_AU8820"),
        Formula::and(guard.clone(), "CHIP_AU8820"),
    ));
    outer.children.push(block(
        14,
        15,
        Formula::not("CHIP_AU8820"),
        Formula::and(guard.clone(), Formula::not("CHIP_AU8820")),
    ));
    outer.children.push(block(
        26,
        31,
        Formula::or("CHIP_AU8820", "CHIP_AU8830"),
        Formula::and(guard, Formula::or("CHIP_AU8820", "CHIP_AU8830")),
    ));

    // all code sits inside the top guard, so no pseudo block is synthesized
    assert_eq!(blocks, vec![outer]);
}

#[test]
fn linux_config_with_macros_fuzzy_comparisons_and_recovery() {
    let code = "\
#if IS_ENABLED(CONFIG_PM) && LINUX_VERSION_CODE >= 0x40400
static int pm_resume(void);
#endif
#if CONFIG_BROKEN ? 1 : 0
static int broken(void);
#endif
int always_here;
";

    let extractor = BlockExtractor::new(ExtractorConfig::for_linux_kernel());
    let blocks = extractor.extract_str(code, "pm.c").unwrap();

    let pm_condition = Formula::and(
        Formula::or("CONFIG_PM", "CONFIG_PM_MODULE"),
        Formula::var("LINUX_VERSION_CODE_ge_263168"),
    );

    let mut pseudo = Block::new("pm.c", 1, 8, Formula::True, Formula::True);
    pseudo.children.push(Block::new(
        "pm.c",
        1,
        2,
        pm_condition.clone(),
        pm_condition,
    ));
    pseudo.children.push(Block::new(
        "pm.c",
        4,
        5,
        Formula::var(PARSING_ERROR_VARIABLE),
        Formula::var(PARSING_ERROR_VARIABLE),
    ));

    assert_eq!(blocks, vec![pseudo]);

    let stats = BlockExtractor::stats(&blocks);
    assert_eq!(stats.conditions, 3);
    assert_eq!(stats.parsing_errors, 1);
}

#[test]
fn strict_config_rejects_what_the_linux_preset_recovers() {
    let code = "#if CONFIG_BROKEN ? 1 : 0\nstatic int broken(void);\n#endif\n";

    let strict = BlockExtractor::default();
    assert!(strict.extract_str(code, "pm.c").is_err());

    let lenient = BlockExtractor::new(ExtractorConfig {
        invalid_conditions: InvalidConditionHandling::True,
        ..Default::default()
    });
    let blocks = lenient.extract_str(code, "pm.c").unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].condition, Formula::True);
}

#[test]
fn extracted_tree_survives_a_json_round_trip() {
    let extractor = BlockExtractor::default();
    let blocks = extractor.extract_str(VORTEX_FIFO, "vortex_fifo.c").unwrap();

    let json = serde_json::to_string_pretty(&blocks).expect("serialize");
    let back: Vec<Block> = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(back, blocks);
}

#[test]
fn presence_conditions_conjoin_ancestors_outer_to_inner() {
    let code = "\
#ifdef OUTER
#ifdef MIDDLE
#ifdef INNER
deep();
#endif
#endif
#endif
";
    let extractor = BlockExtractor::default();
    let blocks = extractor.extract_str(code, "deep.c").unwrap();

    assert_eq!(blocks.len(), 1);
    let outer = &blocks[0];
    let middle = &outer.children[0];
    let inner = &middle.children[0];

    assert_eq!(outer.presence_condition, Formula::var("OUTER"));
    assert_eq!(
        middle.presence_condition,
        Formula::and("OUTER", "MIDDLE")
    );
    assert_eq!(
        inner.presence_condition,
        Formula::and(Formula::and("OUTER", "MIDDLE"), "INNER")
    );
    assert!(inner.contains_line(4));
    assert!(!inner.contains_line(2));
}
