use crate::{model::ModelRequest, types::ReportProfile};

pub fn build_prompt(job_title: &str, profile: ReportProfile) -> ModelRequest {
    ModelRequest {
        system_prompt: build_system_prompt(profile),
        user_prompt: format!(
            "Job title: {}\nAssess how exposed this job is to automation by AI.",
            job_title.trim()
        ),
    }
}

fn build_system_prompt(profile: ReportProfile) -> String {
    let mut prompt = String::from(
        "You are a career analyst who estimates how likely a job is to be automated by AI.\n\
         Reply with a single JSON object and nothing else. No markdown, no commentary.\n\n\
         Fields:\n\
         - risk_score: integer from 0 (safe) to 100 (fully automatable)\n",
    );

    match profile {
        ReportProfile::Standard => {
            prompt.push_str("- summary: two or three sentences explaining the score\n");
        }
        ReportProfile::Regional => {
            prompt.push_str(
                "- summary_global: two or three sentences on the worldwide outlook\n\
                 - summary_india: two or three sentences on the outlook in India\n",
            );
        }
    }

    prompt.push_str(&format!(
        "- factors: up to {} short reasons driving the score\n",
        ReportProfile::MAX_FACTORS
    ));

    match profile {
        ReportProfile::Standard => prompt.push_str(&format!(
            "- tools: up to {} AI tools or skills worth learning\n",
            profile.max_tools()
        )),
        ReportProfile::Regional => prompt.push_str(&format!(
            "- tools: up to {} learning resources or AI tools, each formatted exactly as \
             \"Name (https://url)\"\n",
            profile.max_tools()
        )),
    }

    prompt.push_str(&format!(
        "- roadmap: up to {} weekly steps, each starting with \"Week N:\"\n",
        ReportProfile::MAX_ROADMAP
    ));
    prompt
}
