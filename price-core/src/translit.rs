//! Транслитерация латиница <-> кириллица для поиска.
//!
//! Пользователь может набрать название в любой раскладке: "samsung" найдёт
//! "Самсунг" и наоборот. Правила упрощённые (ГОСТ-подобные), но
//! детерминированные: одна и та же строка всегда даёт один и тот же вариант.

/// Многобуквенные сочетания проверяются раньше одиночных букв, длинные — раньше коротких
const LATIN_DIGRAPHS: &[(&str, &str)] = &[
    ("shch", "щ"),
    ("sch", "щ"),
    ("zh", "ж"),
    ("kh", "х"),
    ("ts", "ц"),
    ("ch", "ч"),
    ("sh", "ш"),
    ("yu", "ю"),
    ("ju", "ю"),
    ("ya", "я"),
    ("ja", "я"),
    ("yo", "ё"),
    ("jo", "ё"),
];

fn latin_letter(c: char) -> Option<&'static str> {
    let s = match c {
        'a' => "а",
        'b' => "б",
        'c' => "ц",
        'd' => "д",
        'e' => "е",
        'f' => "ф",
        'g' => "г",
        'h' => "х",
        'i' => "и",
        'j' => "й",
        'k' => "к",
        'l' => "л",
        'm' => "м",
        'n' => "н",
        'o' => "о",
        'p' => "п",
        'q' => "к",
        'r' => "р",
        's' => "с",
        't' => "т",
        'u' => "у",
        'v' => "в",
        'w' => "в",
        'x' => "кс",
        'y' => "ы",
        'z' => "з",
        _ => return None,
    };
    Some(s)
}

fn cyrillic_letter(c: char) -> Option<&'static str> {
    let s = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "'",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(s)
}

/// Латиница -> кириллица. Прочие символы (цифры, знаки, кириллица) не меняются.
pub fn to_cyrillic(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut i = 0;

    'outer: while i < chars.len() {
        let upper = chars[i].is_uppercase();

        for &(latin, cyr) in LATIN_DIGRAPHS {
            let n = latin.chars().count();
            if i + n > chars.len() {
                continue;
            }
            let matches = chars[i..i + n]
                .iter()
                .zip(latin.chars())
                .all(|(c, l)| c.to_lowercase().eq(std::iter::once(l)));
            if matches {
                push_cased(&mut out, cyr, upper);
                i += n;
                continue 'outer;
            }
        }

        let lower = chars[i].to_ascii_lowercase();
        match latin_letter(lower) {
            Some(cyr) => push_cased(&mut out, cyr, upper),
            None => out.push(chars[i]),
        }
        i += 1;
    }

    out
}

/// Кириллица -> латиница. Прочие символы не меняются.
pub fn to_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        let upper = c.is_uppercase();
        let lower = c.to_lowercase().next().unwrap_or(c);
        match cyrillic_letter(lower) {
            Some(lat) => push_cased(&mut out, lat, upper),
            None => out.push(c),
        }
    }

    out
}

// для заглавной буквы поднимаем регистр только первого символа: "Ж" -> "Zh"
fn push_cased(out: &mut String, s: &str, upper: bool) {
    if !upper {
        out.push_str(s);
        return;
    }
    let mut it = s.chars();
    if let Some(first) = it.next() {
        out.extend(first.to_uppercase());
        out.push_str(it.as_str());
    }
}
