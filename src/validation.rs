//! Validações e máscaras de entrada compartilhadas pelos formulários.

/// Valida CPF (básico): 11 dígitos, não todos iguais.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<char> = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return false;
    }
    digits.iter().any(|d| *d != digits[0])
}

/// Valida e-mail no formato local@dominio.tld.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains(char::is_whitespace) {
        return false;
    }
    if domain.contains('@') || domain.contains(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Valida telefone (básico): 10 ou 11 dígitos.
pub fn is_valid_phone(phone: &str) -> bool {
    let count = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (10..=11).contains(&count)
}

/// Valida nome: mínimo 3 caracteres após trim.
pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 3
}

/// Valida idade: entre 1 e 50.
pub fn is_valid_age(age: u32) -> bool {
    (1..=50).contains(&age)
}

/// Máscaras progressivas de digitação, espelhando o comportamento dos
/// formulários web: aplicam a pontuação disponível para a quantidade de
/// dígitos já informada e descartam o excedente.
pub mod masks {
    /// Máscara CPF: 000.000.000-00 (hífen só com os 11 dígitos completos).
    pub fn cpf(value: &str) -> String {
        let digits: Vec<char> = value
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(11)
            .collect();
        let mut out = String::with_capacity(14);
        for (i, digit) in digits.iter().enumerate() {
            if i == 3 || i == 6 {
                out.push('.');
            }
            if i == 9 && digits.len() == 11 {
                out.push('-');
            }
            out.push(*digit);
        }
        out
    }

    /// Máscara telefone: (00) 0000-0000 ou (00) 90000-0000.
    pub fn phone(value: &str) -> String {
        let digits: String = value
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(11)
            .collect();
        if digits.len() < 3 {
            return digits;
        }
        let (area, rest) = digits.split_at(2);
        let hyphen_at = if digits.len() <= 10 { 4 } else { 5 };
        if rest.len() <= hyphen_at {
            return format!("({}) {}", area, rest);
        }
        let (prefix, suffix) = rest.split_at(hyphen_at);
        format!("({}) {}-{}", area, prefix, suffix)
    }

    /// Remove a máscara, mantendo apenas os dígitos.
    pub fn unmask(value: &str) -> String {
        value.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}
