//! Census data for the AM-DeepSeek-R1-Distilled-1.4M corpus.
//!
//! Populations were counted over the `0.9M.jsonl` and `0.5M.jsonl` shards
//! after mapping raw tags to their parent bucket.

/// Parent bucket populations in canonical output order.
pub const AM_DEEPSEEK_POPULATIONS: &[(&str, u64)] = &[
    ("natural_reasoning", 319_085),
    ("InfinityInstruct", 306_675),
    ("KodCode", 210_838),
    ("Dolphin-R1", 63_921),
    ("openR1Math_extended", 63_290),
    ("NuminaMath_1.5", 62_446),
    ("openR1Math_default", 62_239),
    ("codeio", 55_176),
    ("GeneralThought-Feb25", 50_600),
    ("openThoughts", 34_620),
    ("OpenCoder", 22_249),
    ("data_ablation_full59K", 14_155),
    ("MetaMathQA", 14_083),
    ("Other", 120_623),
];

/// Raw provenance tag to parent bucket.
pub const AM_DEEPSEEK_PARENT_MAP: &[(&str, &str)] = &[
    ("natural_reasoning", "natural_reasoning"),
    ("InfinityInstruct", "InfinityInstruct"),
    ("KodCode", "KodCode"),
    ("Dolphin-R1", "Dolphin-R1"),
    ("dolphin_R1_other", "Dolphin-R1"),
    ("openR1Math_extended", "openR1Math_extended"),
    ("openR1Math_default", "openR1Math_default"),
    ("NuminaMath_1.5", "NuminaMath_1.5"),
    ("MATH_numina", "NuminaMath_1.5"),
    ("MATH-lighteval", "NuminaMath_1.5"),
    ("GeneralThought-Feb25", "GeneralThought-Feb25"),
    ("openThoughts", "openThoughts"),
    ("openThoughts_other", "openThoughts"),
    ("OpenCoder", "OpenCoder"),
    ("OpenCoderStage2", "OpenCoder"),
    ("codeio", "codeio"),
    ("data_ablation_full59K", "data_ablation_full59K"),
    ("MetaMathQA", "MetaMathQA"),
    ("MATH_metamathQA", "MetaMathQA"),
    ("Bespoke17k", "Other"),
    ("Omni-MATH", "Other"),
    ("PRIME", "Other"),
    ("prime", "Other"),
    ("aime", "Other"),
    ("evol-en", "Other"),
    ("evol-zh", "Other"),
    ("limo", "Other"),
    ("open_orca", "Other"),
    ("s1K-1.1", "Other"),
];
