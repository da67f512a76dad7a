use lsconf_core::Language;

pub fn run() {
    for language in Language::all() {
        let aliases = language.aliases();
        if aliases.is_empty() {
            println!("{language}");
        } else {
            println!("{:<12} {}", language.as_str(), aliases.join(", "));
        }
    }
}
