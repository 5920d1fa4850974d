//! Prompt that asks the model to fill the minutes template.

/// Builds the instruction sent to the model.
pub fn build_prompt(resumo: &str, data: &str, requerimento: &str, titulo: &str, template: &str) -> String {
    format!(
        "\nVocê é um agente que gera atas conforme o template abaixo. \n\
         Resumo do usuário: {resumo}\n\
         Data: {data}\n\
         Requerimento da ATA: {requerimento}\n\
         Título: {titulo}\n\
         Template: {template}\n\
         Gere a ata preenchida conforme as regras do template, com tópicos e contexto descritivo.\n"
    )
}
