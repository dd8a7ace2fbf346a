//! Identifier normalization and English noun inflection.
//!
//! Every GraphQL name in a generated schema is derived from table and column
//! names through the functions in this module, so they must stay pure and
//! deterministic: the same database always yields the same API surface.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use regex::{Captures, Regex};

/// Converts an arbitrary snake, Pascal or mixed case identifier into a
/// lower camel case GraphQL field name.
pub fn to_field_name(raw: &str) -> String {
	raw.to_lower_camel_case()
}

/// Converts a table name into a singular Pascal case GraphQL type name.
pub fn to_type_name(raw: &str) -> String {
	singularize(raw).to_upper_camel_case()
}

/// Returns the plural form of a noun, preserving its casing.
pub fn pluralize(word: &str) -> String {
	inflect(word, &INFLECTOR.plurals, &INFLECTOR.singulars, &INFLECTOR.plural_rules)
}

/// Returns the singular form of a noun, preserving its casing.
pub fn singularize(word: &str) -> String {
	inflect(word, &INFLECTOR.singulars, &INFLECTOR.plurals, &INFLECTOR.singular_rules)
}

struct Rule {
	pattern: Regex,
	replacement: &'static str,
}

struct Inflector {
	/// Irregular singular to plural
	plurals: HashMap<&'static str, &'static str>,
	/// Irregular plural to singular
	singulars: HashMap<&'static str, &'static str>,
	uncountables: HashSet<&'static str>,
	/// Later rules take precedence over earlier ones
	plural_rules: Vec<Rule>,
	singular_rules: Vec<Rule>,
}

const IRREGULAR: &[(&str, &str)] = &[
	// Pronouns
	("i", "we"),
	("me", "us"),
	("he", "they"),
	("she", "they"),
	("them", "them"),
	("myself", "ourselves"),
	("yourself", "yourselves"),
	("itself", "themselves"),
	("herself", "themselves"),
	("himself", "themselves"),
	("themself", "themselves"),
	("is", "are"),
	("was", "were"),
	("has", "have"),
	("this", "these"),
	("that", "those"),
	// Words ending with a consonant and `o`
	("echo", "echoes"),
	("dingo", "dingoes"),
	("volcano", "volcanoes"),
	("tornado", "tornadoes"),
	("torpedo", "torpedoes"),
	// Ends with `us`
	("genus", "genera"),
	("viscus", "viscera"),
	// Ends with `ma`
	("stigma", "stigmata"),
	("stoma", "stomata"),
	("dogma", "dogmata"),
	("lemma", "lemmata"),
	("schema", "schemata"),
	("anathema", "anathemata"),
	// Other irregular rules
	("ox", "oxen"),
	("axe", "axes"),
	("die", "dice"),
	("yes", "yeses"),
	("foot", "feet"),
	("eave", "eaves"),
	("goose", "geese"),
	("tooth", "teeth"),
	("quiz", "quizzes"),
	("human", "humans"),
	("proof", "proofs"),
	("carve", "carves"),
	("valve", "valves"),
	("looey", "looies"),
	("thief", "thieves"),
	("groove", "grooves"),
	("pickaxe", "pickaxes"),
	("passerby", "passersby"),
];

const PLURAL_RULES: &[(&str, &str)] = &[
	(r"s?$", "s"),
	(r"[^\x00-\x7F]$", "$0"),
	(r"([^aeiou]ese)$", "$1"),
	(r"(ax|test)is$", "$1es"),
	(r"(alias|[^aou]us|t[lm]as|gas|ris)$", "$1es"),
	(r"(e[mn]u)s?$", "$1s"),
	(r"([^l]ias|[aeiou]las|[ejzr]as|[iu]am)$", "$1"),
	(
		r"(alumn|syllab|vir|radi|nucle|fung|cact|stimul|termin|bacill|foc|uter|loc|strat)(?:us|i)$",
		"$1i",
	),
	(r"(alumn|alg|vertebr)(?:a|ae)$", "$1ae"),
	(r"(seraph|cherub)(?:im)?$", "$1im"),
	(r"(her|at|gr)o$", "$1oes"),
	(
		r"(agend|addend|millenni|dat|extrem|bacteri|desiderat|strat|candelabr|errat|ov|symposi|curricul|automat|quor)(?:a|um)$",
		"$1a",
	),
	(
		r"(apheli|hyperbat|periheli|asyndet|noumen|phenomen|criteri|organ|prolegomen|hedr|automat)(?:a|on)$",
		"$1a",
	),
	(r"sis$", "ses"),
	(r"(?:(kni|wi|li)fe|(ar|l|ea|eo|oa|hoo)f)$", "$1$2ves"),
	(r"([^aeiouy]|qu)y$", "$1ies"),
	(r"([^ch][ieo][ln])ey$", "$1ies"),
	(r"(x|ch|ss|sh|zz)$", "$1es"),
	(r"(matr|cod|mur|sil|vert|ind|append)(?:ix|ex)$", "$1ices"),
	(r"\b((?:tit)?m|l)(?:ice|ouse)$", "$1ice"),
	(r"(pe)(?:rson|ople)$", "$1ople"),
	(r"(child)(?:ren)?$", "$1ren"),
	(r"eaux$", "$0"),
	(r"m[ae]n$", "men"),
	(r"^thou$", "you"),
];

const SINGULAR_RULES: &[(&str, &str)] = &[
	(r"s$", ""),
	(r"(ss)$", "$1"),
	(r"(wi|kni|(?:after|half|high|low|mid|non|night|[^\w]|^)li)ves$", "$1fe"),
	(r"(ar|(?:wo|[ae])l|[eo][ao])ves$", "$1f"),
	(r"ies$", "y"),
	(r"(dg|ss|ois|lk|ok|wn|mb|th|ch|ec|oal|is|ck|ix|sser|ts|wb)ies$", "$1ie"),
	(
		r"\b(l|(?:neck|cross|hog|aun)?t|coll|faer|food|gen|goon|group|hipp|junk|vegg|(?:pork)?p|charl|calor|cut)ies$",
		"$1ie",
	),
	(r"\b(mon|smil)ies$", "$1ey"),
	(r"\b((?:tit)?m|l)ice$", "$1ouse"),
	(r"(seraph|cherub)im$", "$1"),
	(
		r"(x|ch|ss|sh|zz|tto|go|cho|alias|[^aou]us|t[lm]as|gas|(?:her|at|gr)o|[aeiou]ris)(?:es)?$",
		"$1",
	),
	(r"(analy|diagno|parenthe|progno|synop|the|empha|cri|ne)(?:sis|ses)$", "$1sis"),
	(r"(movie|twelve|abuse|e[mn]u)s$", "$1"),
	(r"(test)(?:is|es)$", "$1is"),
	(
		r"(alumn|syllab|vir|radi|nucle|fung|cact|stimul|termin|bacill|foc|uter|loc|strat)(?:us|i)$",
		"$1us",
	),
	(
		r"(agend|addend|millenni|dat|extrem|bacteri|desiderat|strat|candelabr|errat|ov|symposi|curricul|quor)a$",
		"$1um",
	),
	(
		r"(apheli|hyperbat|periheli|asyndet|noumen|phenomen|criteri|organ|prolegomen|hedr|automat)a$",
		"$1on",
	),
	(r"(alumn|alg|vertebr)ae$", "$1a"),
	(r"(cod|mur|sil|vert|ind)ices$", "$1ex"),
	(r"(matr|append)ices$", "$1ix"),
	(r"(pe)(rson|ople)$", "$1rson"),
	(r"(child)ren$", "$1"),
	(r"(eau)x?$", "$1"),
	(r"men$", "man"),
];

const UNCOUNTABLE: &[&str] = &[
	"adulthood",
	"advice",
	"agenda",
	"aid",
	"aircraft",
	"alcohol",
	"ammo",
	"analytics",
	"anime",
	"athletics",
	"audio",
	"bison",
	"blood",
	"bream",
	"buffalo",
	"butter",
	"carp",
	"cash",
	"chassis",
	"chess",
	"clothing",
	"cod",
	"commerce",
	"cooperation",
	"corps",
	"debris",
	"diabetes",
	"digestion",
	"elk",
	"energy",
	"equipment",
	"excretion",
	"expertise",
	"firmware",
	"flounder",
	"fun",
	"gallows",
	"garbage",
	"graffiti",
	"hardware",
	"headquarters",
	"health",
	"herpes",
	"highjinks",
	"homework",
	"housework",
	"information",
	"jeans",
	"justice",
	"kudos",
	"labour",
	"literature",
	"machinery",
	"mackerel",
	"mail",
	"media",
	"mews",
	"moose",
	"music",
	"mud",
	"manga",
	"news",
	"only",
	"personnel",
	"pike",
	"plankton",
	"pliers",
	"police",
	"pollution",
	"premises",
	"rain",
	"research",
	"rice",
	"salmon",
	"scissors",
	"series",
	"sewage",
	"shambles",
	"shrimp",
	"software",
	"staff",
	"swine",
	"tennis",
	"traffic",
	"transportation",
	"trout",
	"tuna",
	"wealth",
	"welfare",
	"whiting",
	"wildebeest",
	"wildlife",
	"you",
];

/// Uncountable word endings, checked before any other rule
const UNCOUNTABLE_RULES: &[&str] =
	&[r"pok[eé]mon$", r"[^aeiou]ese$", r"deer$", r"fish$", r"measles$", r"o[iu]s$", r"pox$", r"sheep$"];

static INFLECTOR: LazyLock<Inflector> = LazyLock::new(Inflector::new);

impl Inflector {
	fn new() -> Self {
		let rules = |table: &[(&'static str, &'static str)]| -> Vec<Rule> {
			table
				.iter()
				.copied()
				.chain(UNCOUNTABLE_RULES.iter().map(|&pattern| (pattern, "$0")))
				.filter_map(|(pattern, replacement)| {
					// The tables above are constant and covered by tests
					Regex::new(&format!("(?i){pattern}")).ok().map(|pattern| Rule {
						pattern,
						replacement,
					})
				})
				.collect()
		};
		Inflector {
			plurals: IRREGULAR.iter().copied().collect(),
			singulars: IRREGULAR.iter().map(|&(single, plural)| (plural, single)).collect(),
			uncountables: UNCOUNTABLE.iter().copied().collect(),
			plural_rules: rules(PLURAL_RULES),
			singular_rules: rules(SINGULAR_RULES),
		}
	}
}

fn inflect(
	word: &str,
	replace: &HashMap<&'static str, &'static str>,
	keep: &HashMap<&'static str, &'static str>,
	rules: &[Rule],
) -> String {
	let token = word.to_lowercase();
	if keep.contains_key(token.as_str()) {
		return restore_case(word, &token);
	}
	if let Some(replacement) = replace.get(token.as_str()) {
		return restore_case(word, replacement);
	}
	if token.is_empty() || INFLECTOR.uncountables.contains(token.as_str()) {
		return word.to_owned();
	}
	for rule in rules.iter().rev() {
		if let Some(caps) = rule.pattern.captures(word) {
			return apply(word, rule.replacement, &caps);
		}
	}
	word.to_owned()
}

fn apply(word: &str, replacement: &str, caps: &Captures) -> String {
	let Some(found) = caps.get(0) else {
		return word.to_owned();
	};
	let result = interpolate(replacement, caps);
	// An empty match takes its casing from the preceding character
	let restored = if found.as_str().is_empty() {
		let previous = word[..found.start()].chars().last().map(String::from).unwrap_or_default();
		restore_case(&previous, &result)
	} else {
		restore_case(found.as_str(), &result)
	};
	format!("{}{}{}", &word[..found.start()], restored, &word[found.end()..])
}

/// Expands `$N` group references, with missing groups expanding to nothing
fn interpolate(replacement: &str, caps: &Captures) -> String {
	let mut out = String::with_capacity(replacement.len());
	let mut chars = replacement.chars().peekable();
	while let Some(c) = chars.next() {
		match chars.peek().and_then(|n| n.to_digit(10)) {
			Some(group) if c == '$' => {
				chars.next();
				if let Some(m) = caps.get(group as usize) {
					out.push_str(m.as_str());
				}
			}
			_ => out.push(c),
		}
	}
	out
}

fn restore_case(word: &str, token: &str) -> String {
	if word == token {
		return token.to_owned();
	}
	if word == word.to_lowercase() {
		return token.to_lowercase();
	}
	if word == word.to_uppercase() {
		return token.to_uppercase();
	}
	match word.chars().next() {
		Some(first) if !first.is_lowercase() => {
			let mut chars = token.chars();
			match chars.next() {
				Some(head) => head.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
				None => String::new(),
			}
		}
		_ => token.to_lowercase(),
	}
}
