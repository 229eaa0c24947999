//! Display strings for the enumerated codes stored on vagas, candidatos and
//! entrevistas. Unknown codes are shown as-is.

pub fn status_label(status: &str) -> &str {
    match status {
        "aberta" => "Aberta",
        "divulgacao_prospec" => "Divulgação/Prospecção",
        "entrevista_nc" => "Entrevista NC",
        "entrevista_empresa" => "Entrevista Empresa",
        "testes" => "Testes",
        "fechada" => "Fechada",
        "fechada_rep" => "Fechada/Reposição",
        "cancelada_cliente" => "Cancelada",
        "standby" => "Standby",
        "nao_cobrada" => "Não Cobrada",
        "encerramento_cont" => "Encerramento",
        other => other,
    }
}

pub fn tipo_cargo_label(tipo: &str) -> &str {
    match tipo {
        "administrativo" => "Administrativo",
        "comercial" => "Comercial",
        "estagio" => "Estágio",
        "gestao" => "Gestão",
        "operacional" => "Operacional",
        "jovem_aprendiz" => "Jovem Aprendiz",
        other => other,
    }
}

pub fn tipo_abertura_label(tipo: &str) -> &str {
    if tipo == "nova" {
        "Nova"
    } else {
        "Reposição"
    }
}

pub fn fonte_recrutamento_label(fonte: &str) -> &str {
    match fonte {
        "catho" => "Catho",
        "email" => "E-mail",
        "indicacao" => "Indicação",
        "linkedin" => "LinkedIn",
        "whatsapp" => "WhatsApp",
        "trafego" => "Tráfego Pago",
        "outros" => "Outros",
        other => other,
    }
}

pub fn candidato_status_label(status: &str) -> &str {
    match status {
        "pendente" => "Pendente",
        "aprovado" => "Aprovado",
        "reprovado" => "Reprovado",
        other => other,
    }
}

pub fn vaga_candidato_status_label(status: &str) -> &str {
    match status {
        "inscrito" => "Inscrito",
        "triagem" => "Triagem",
        "entrevista_agendada" => "Entrevista Agendada",
        "entrevista_realizada" => "Entrevista Realizada",
        "aprovado" => "Aprovado",
        "reprovado" => "Reprovado",
        "desistiu" => "Desistiu",
        other => other,
    }
}

pub fn entrevista_status_label(status: &str) -> &str {
    match status {
        "agendada" => "Agendada",
        "realizada" => "Realizada",
        "cancelada" => "Cancelada",
        "nao_compareceu" => "Não Compareceu",
        "remarcada" => "Remarcada",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_labels() {
        assert_eq!(status_label("fechada_rep"), "Fechada/Reposição");
        assert_eq!(status_label("cancelada_cliente"), "Cancelada");
        assert_eq!(tipo_cargo_label("jovem_aprendiz"), "Jovem Aprendiz");
        assert_eq!(candidato_status_label("pendente"), "Pendente");
        assert_eq!(entrevista_status_label("nao_compareceu"), "Não Compareceu");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(status_label("arquivada"), "arquivada");
        assert_eq!(tipo_cargo_label(""), "");
    }

    #[test]
    fn anything_but_nova_is_reposicao() {
        assert_eq!(tipo_abertura_label("nova"), "Nova");
        assert_eq!(tipo_abertura_label("reposicao"), "Reposição");
    }
}
